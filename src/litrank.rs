//! The `Litrank` facade: one configured engine over a data directory
//!
//! `Litrank` wires the store, the topic catalogue, the user profiles and the
//! model-backed collaborators together from a `LitrankConfig`, so callers
//! deal with a single handle instead of assembling the pipeline by hand.

use chrono::NaiveDate;
use litrank_core::{
    Embedder, Error, Result, ScoredWork, SearchMode, SummarizedWork, Topic, TopicId,
    TopicWorkSource, Work,
};
use litrank_engine::{
    Bm25Params, LitrankConfig, ProfileLog, PublicationStore, TopicStore, CONFIG_FILE_NAME,
};
use litrank_intelligence::{
    ApiComparisonOracle, ApiCompleter, ApiEmbedder, ComparisonOracle, CompletionProvider,
    IngestReport, Ingestor, OpenAlexClient, RetrievalPipeline, SetwiseReranker, Summarizer,
    TopicMatch, TopicMatcher, UsageTracker,
};
use litrank_search::{score_by_topics, HybridSearch, WeightedSumFuser};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the publication snapshot inside a data directory
pub const SNAPSHOT_FILE_NAME: &str = "publications.bin";

/// File name of the topic catalogue snapshot
pub const TOPICS_FILE_NAME: &str = "topics.bin";

/// File name of the user profile snapshot
pub const PROFILES_FILE_NAME: &str = "profiles.bin";

/// Model-backed collaborators used by a `Litrank` instance
#[derive(Clone)]
pub struct Collaborators {
    /// Embeds queries, abstracts and topic descriptions
    pub embedder: Arc<dyn Embedder>,
    /// Answers alignment and summary prompts
    pub completer: Arc<dyn CompletionProvider>,
    /// Orders candidate sets for the setwise reranker
    pub oracle: Arc<dyn ComparisonOracle>,
    /// Lists works by topic for query-driven ingestion
    pub works: Arc<dyn TopicWorkSource>,
}

impl Collaborators {
    /// HTTP-backed collaborators built from `config`, all reporting to `usage`
    pub fn from_config(config: &LitrankConfig, usage: Arc<UsageTracker>) -> Self {
        Collaborators {
            embedder: Arc::new(
                ApiEmbedder::from_config(&config.embedding).with_usage_tracker(usage.clone()),
            ),
            completer: Arc::new(
                ApiCompleter::from_config(&config.model).with_usage_tracker(usage.clone()),
            ),
            oracle: Arc::new(
                ApiComparisonOracle::from_config(&config.model).with_usage_tracker(usage),
            ),
            works: Arc::new(OpenAlexClient::from_config(&config.openalex)),
        }
    }
}

/// A configured retrieval and ranking engine
pub struct Litrank {
    config: LitrankConfig,
    data_dir: Option<PathBuf>,
    store: Arc<PublicationStore>,
    topics: Arc<TopicStore>,
    profiles: ProfileLog,
    collaborators: Collaborators,
    usage: Arc<UsageTracker>,
    pipeline: RetrievalPipeline,
}

/// Stateful parts restored from, or written to, a data directory
struct State {
    store: PublicationStore,
    topics: TopicStore,
    profiles: ProfileLog,
}

/// `dir/name` if that file exists
fn existing(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.exists().then_some(path)
}

fn check_dimension(path: &Path, found: usize, configured: usize) -> Result<()> {
    if found != configured {
        return Err(Error::Config(format!(
            "snapshot '{}' holds {}-dimensional embeddings but {} sets embedding.dimensions = {}",
            path.display(),
            found,
            CONFIG_FILE_NAME,
            configured
        )));
    }
    Ok(())
}

impl Litrank {
    /// Open the engine rooted at `path`
    ///
    /// The directory is created if needed. `litrank.toml` is written with
    /// defaults on first use. Publications, the topic catalogue and user
    /// profiles written by [`save`](Self::save) are loaded when present.
    /// Collaborators talk to the configured HTTP endpoints.
    ///
    /// # Errors
    /// - `Error::Io` if the directory cannot be created
    /// - `Error::Config` if the config file is invalid or a snapshot was
    ///   written for another embedding dimension
    /// - `Error::Serialization` if a snapshot is corrupt
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, Collaborators::from_config)
    }

    /// Like [`open`](Self::open), with collaborators built by `make` from the
    /// loaded config and the instance's usage tracker
    pub fn open_with<P, F>(path: P, make: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnOnce(&LitrankConfig, Arc<UsageTracker>) -> Collaborators,
    {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        let config = LitrankConfig::load_or_create(&data_dir)?;
        let usage = Arc::new(UsageTracker::from_config(&config));
        let collaborators = make(&config, usage.clone());

        let dims = config.embedding.dimensions;
        let bm25 = Bm25Params::new(config.search.bm25_k1, config.search.bm25_b);
        let store = match existing(&data_dir, SNAPSHOT_FILE_NAME) {
            Some(path) => {
                let store = PublicationStore::load_snapshot_with_bm25(&path, bm25)?;
                check_dimension(&path, store.dimension(), dims)?;
                store
            }
            None => PublicationStore::with_bm25(dims, bm25),
        };
        let topics = match existing(&data_dir, TOPICS_FILE_NAME) {
            Some(path) => {
                let topics = TopicStore::load_snapshot(&path)?;
                check_dimension(&path, topics.dimension(), dims)?;
                topics
            }
            None => TopicStore::new(dims),
        };
        let profiles = match existing(&data_dir, PROFILES_FILE_NAME) {
            Some(path) => ProfileLog::load_snapshot(&path)?,
            None => ProfileLog::new(),
        };

        tracing::info!(
            target: "litrank::facade",
            path = %data_dir.display(),
            works = store.len(),
            topics = topics.len(),
            "Opened litrank"
        );
        Self::assemble(
            config,
            Some(data_dir),
            State {
                store,
                topics,
                profiles,
            },
            collaborators,
            usage,
        )
    }

    /// An in-memory engine with caller-supplied collaborators
    ///
    /// # Errors
    /// Returns `Error::Config` if `config` fails validation.
    pub fn in_memory(config: LitrankConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let usage = Arc::new(UsageTracker::from_config(&config));
        let dims = config.embedding.dimensions;
        let state = State {
            store: PublicationStore::with_bm25(
                dims,
                Bm25Params::new(config.search.bm25_k1, config.search.bm25_b),
            ),
            topics: TopicStore::new(dims),
            profiles: ProfileLog::new(),
        };
        Self::assemble(config, None, state, collaborators, usage)
    }

    fn assemble(
        config: LitrankConfig,
        data_dir: Option<PathBuf>,
        state: State,
        collaborators: Collaborators,
        usage: Arc<UsageTracker>,
    ) -> Result<Self> {
        let store = Arc::new(state.store);
        let fuser = WeightedSumFuser::new(config.search.vector_weight, config.search.lexical_weight)?;
        let search = HybridSearch::new(
            collaborators.embedder.clone(),
            store.clone(),
            store.clone(),
        )
        .with_fuser(Arc::new(fuser))
        .with_overfetch_factor(config.search.overfetch_factor);
        let reranker =
            SetwiseReranker::new(collaborators.oracle.clone()).with_children(config.rerank.children);
        let pipeline = RetrievalPipeline::new(search, store.clone())
            .with_reranker(Arc::new(reranker))
            .with_rerank_factor(config.search.rerank_factor);

        Ok(Litrank {
            config,
            data_dir,
            store,
            topics: Arc::new(state.topics),
            profiles: state.profiles,
            collaborators,
            usage,
            pipeline,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Active configuration
    pub fn config(&self) -> &LitrankConfig {
        &self.config
    }

    /// Data directory, `None` for in-memory instances
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Publication store
    pub fn store(&self) -> &Arc<PublicationStore> {
        &self.store
    }

    /// Topic catalogue
    pub fn topics(&self) -> &Arc<TopicStore> {
        &self.topics
    }

    /// User profiles
    pub fn profiles(&self) -> &ProfileLog {
        &self.profiles
    }

    /// Token and cost accounting for the HTTP collaborators
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// The configured retrieval pipeline
    pub fn pipeline(&self) -> &RetrievalPipeline {
        &self.pipeline
    }

    // =========================================================================
    // Publications
    // =========================================================================

    /// Embed and insert works not yet stored
    pub fn ingest(&self, works: Vec<Work>) -> Result<IngestReport> {
        Ingestor::new(self.store.clone(), self.collaborators.embedder.clone())
            .with_chunk_size(self.config.embedding.ingest_chunk_size)
            .ingest(works)
    }

    /// Retrieve with the configured default mode and rerank setting
    pub fn retrieve(&self, query: &str, n: usize, min_date: Option<NaiveDate>) -> Result<Vec<Work>> {
        self.pipeline.retrieve(
            query,
            n,
            min_date,
            self.config.search.default_mode,
            self.config.rerank.enabled,
        )
    }

    /// Retrieve with an explicit mode and rerank choice
    pub fn retrieve_with(
        &self,
        query: &str,
        n: usize,
        min_date: Option<NaiveDate>,
        mode: SearchMode,
        rerank: bool,
    ) -> Result<Vec<Work>> {
        self.pipeline.retrieve(query, n, min_date, mode, rerank)
    }

    /// Customized summaries of `works` for an area of research
    pub fn summarize(&self, area_of_research: &str, works: &[Work]) -> Result<Vec<SummarizedWork>> {
        Summarizer::new(self.collaborators.completer.clone()).summarize(area_of_research, works)
    }

    /// Write publications, the topic catalogue and user profiles into the
    /// data directory
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` for in-memory instances.
    pub fn save(&self) -> Result<()> {
        let dir = self
            .data_dir
            .as_ref()
            .ok_or_else(|| Error::invalid_input("in-memory instance has no data directory"))?;
        self.store.save_snapshot(&dir.join(SNAPSHOT_FILE_NAME))?;
        self.topics.save_snapshot(&dir.join(TOPICS_FILE_NAME))?;
        self.profiles.save_snapshot(&dir.join(PROFILES_FILE_NAME))
    }

    /// Fetch and ingest the works of the topics nearest `query`
    ///
    /// Matches `num_topics` catalogue topics, lists their works published
    /// on or after `start_date` (abstract required, at most `limit`) and
    /// ingests those not yet stored. Returns the matched topics and the
    /// ingest report.
    ///
    /// # Errors
    /// - `Error::Embedding` if the query cannot be embedded
    /// - `Error::Hydration` if the topic listing fails
    /// - any ingestion error; nothing is inserted if a listed work lacks an
    ///   abstract
    pub fn initialize_for_query(
        &self,
        query: &str,
        start_date: NaiveDate,
        limit: Option<usize>,
        num_topics: usize,
    ) -> Result<(Vec<Topic>, IngestReport)> {
        let matched = self.match_topics(query, num_topics, false)?;
        let topics: Vec<Topic> = matched.topics.into_iter().map(|(topic, _)| topic).collect();
        let ids: Vec<TopicId> = topics.iter().map(|t| t.id).collect();

        let works = self
            .collaborators
            .works
            .works_by_topics(&ids, start_date, true, limit)?;
        let listed = works.len();
        let report = self.ingest(works)?;
        tracing::info!(
            target: "litrank::facade",
            topics = ids.len(),
            listed,
            inserted = report.inserted,
            already_present = report.skipped_known,
            "Initialized for query"
        );
        Ok((topics, report))
    }

    // =========================================================================
    // Topics and profiles
    // =========================================================================

    /// Embed a topic's description (or its name) and add it to the catalogue
    pub fn add_topic(&self, topic: Topic) -> Result<()> {
        let text = topic.description.as_deref().unwrap_or(&topic.name);
        let embedding = self.collaborators.embedder.embed(text)?;
        self.topics.insert(topic, embedding)
    }

    fn topic_matcher(&self) -> TopicMatcher {
        TopicMatcher::new(self.collaborators.embedder.clone(), self.topics.clone())
            .with_completer(self.collaborators.completer.clone())
    }

    /// Nearest `n` topics to a research description
    pub fn match_topics(&self, description: &str, n: usize, align: bool) -> Result<TopicMatch> {
        self.topic_matcher().match_topics(description, n, align)
    }

    /// Match topics for `user` and activate them in a new profile version
    pub fn set_area_of_interest(
        &self,
        user: &str,
        description: &str,
        n: usize,
        align: bool,
    ) -> Result<u32> {
        self.topic_matcher()
            .set_area_of_interest(&self.profiles, user, description, n, align)
    }

    /// Score `works` against the topics `user` follows, best first
    ///
    /// Ties keep input order.
    pub fn score_for_user(&self, user: &str, works: Vec<Work>) -> Result<Vec<ScoredWork>> {
        let followed = self.profiles.followed_topics(user)?;
        let mut scored = score_by_topics(works, &followed);
        scored.sort_by(|a, b| b.cmp(a));
        Ok(scored)
    }
}
