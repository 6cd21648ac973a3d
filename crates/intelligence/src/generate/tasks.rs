//! Prompt builders for completion tasks

use super::{CompletionProvider, Message, ModelTier};
use litrank_core::Result;

/// Topic descriptions in the style the topic embeddings were built from
pub const ALIGNMENT_EXAMPLES: [&str; 3] = [
    "This cluster of papers focuses on research related to ad hoc wireless networks, including topics such as routing protocols, mobile ad hoc networks, security, multi-hop wireless routing, and mobility models. It covers various aspects of network capacity, performance analysis, and optimization techniques for ad hoc wireless communication. Additionally, it explores challenges and solutions in areas like interference management, topology control, and channel assignment in wireless mesh networks.",
    "This cluster of papers focuses on the resilience of coral reef ecosystems to the impacts of climate change, including ocean acidification, bleaching, and disease. It explores the role of marine reserves, symbiotic dinoflagellates, and population connectivity in maintaining the health and biodiversity of coral reefs. The cluster also addresses the importance of the coral microbiome and the potential effects of nutrient pollution on coral reef ecosystems.",
    "This cluster of papers explores the impact of social media, particularly Facebook and online communication, on well-being, addictive behavior, and psychological effects, especially among adolescents. It delves into the concept of digital natives, examines the addictive nature of social media use, and investigates the relationship between social media use and various psychological outcomes.",
];

const ALIGN_SYSTEM_PROMPT: &str = "\
You will be provided with a free form text for which embeddings will be created at a later stage. \
In order to improve embedding similarity search, the input needs to be aligned with the input used \
to generate the embeddings. Your task is to align the input to the structure of the following examples, \
while preserving its meaning. In your answers, respond only with the resulting aligned text.\n\n";

const SUMMARY_SYSTEM_PROMPT: &str = "\
You will be provided with the abstract of a scientific publication, as well as a description of an area of research. \
Your task is to generate a summary of the abstract, explaining the topic of the publication and highlighting how it might be relevant to the area of research. \
Additionally, you are to provide a short assessment of how well the publication matches the area of research, which is following below. \
Formulate your answer so that it can be presented alongside the publication metadata to assist the user in deciding whether they should read the publication or not. \
Do not use markdown or any special formatting.\n\n\
Description of the area of research: ";

/// A prompt plus the tier it prefers
pub trait CompletionTask {
    /// Messages sent to the model
    fn messages(&self) -> Vec<Message>;

    /// Whether the quality model should serve this task
    fn prioritize_quality(&self) -> bool {
        true
    }
}

/// Run `task` on `provider` with the tier the task asks for
pub fn run_task(provider: &dyn CompletionProvider, task: &dyn CompletionTask) -> Result<String> {
    provider.complete(
        &task.messages(),
        ModelTier::for_quality(task.prioritize_quality()),
    )
}

/// Rewrite free text into the structure of example texts
#[derive(Debug, Clone)]
pub struct AlignToExamples {
    input: String,
    examples: Vec<String>,
    prioritize_quality: bool,
}

impl AlignToExamples {
    /// Align `input` to [`ALIGNMENT_EXAMPLES`]
    pub fn new(input: impl Into<String>) -> Self {
        Self::with_examples(input, ALIGNMENT_EXAMPLES.iter().map(|s| s.to_string()).collect())
    }

    /// Align `input` to custom examples
    pub fn with_examples(input: impl Into<String>, examples: Vec<String>) -> Self {
        AlignToExamples {
            input: input.into(),
            examples,
            prioritize_quality: true,
        }
    }

    /// Builder: choose the model tier
    pub fn with_prioritize_quality(mut self, prioritize_quality: bool) -> Self {
        self.prioritize_quality = prioritize_quality;
        self
    }
}

impl CompletionTask for AlignToExamples {
    fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(format!("{}{}", ALIGN_SYSTEM_PROMPT, self.examples.join("\n"))),
            Message::user(self.input.clone()),
        ]
    }

    fn prioritize_quality(&self) -> bool {
        self.prioritize_quality
    }
}

/// Summarize an abstract with respect to an area of research
#[derive(Debug, Clone)]
pub struct CustomizedSummary {
    area_of_research: String,
    abstract_text: String,
}

impl CustomizedSummary {
    /// Create the task
    pub fn new(area_of_research: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        CustomizedSummary {
            area_of_research: area_of_research.into(),
            abstract_text: abstract_text.into(),
        }
    }
}

impl CompletionTask for CustomizedSummary {
    fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(format!("{}{}", SUMMARY_SYSTEM_PROMPT, self.area_of_research)),
            Message::user(self.abstract_text.clone()),
        ]
    }
}
