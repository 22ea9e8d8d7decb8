//! Test support: scripted provider fakes and fixture helpers for exercising
//! the recall pipeline without any live backend.

pub mod providers;

use std::{fs, path::Path};

use hindsight_config::Config;
use hindsight_episodes::{EPISODES_FILENAME, EpisodeSummary};

/// A complete, valid configuration rooted at `home_dir`. Provider endpoints
/// point at unroutable localhost ports; tests are expected to swap in the
/// fakes from [`providers`].
pub fn test_config(home_dir: &Path) -> Config {
	let home = home_dir.display();
	let payload = format!(
		r#"
[service]
log_level = "debug"

[store]
home_dir = "{home}"

[providers.embedding]
provider_id = "test"
api_base = "http://127.0.0.1:9"
api_key = "test-key"
path = "/v1/embeddings"
model = "test-embed"
dimensions = 32
timeout_ms = 1000

[providers.semantic]
provider_id = "test"
api_base = "http://127.0.0.1:9"
api_key = "test-key"
path = "/v1/search/semantic"
timeout_ms = 1000

[providers.keyword]
provider_id = "test"
api_base = "http://127.0.0.1:9"
api_key = "test-key"
path = "/v1/search/keyword"
timeout_ms = 1000

[providers.grader]
provider_id = "test"
api_base = "http://127.0.0.1:9"
api_key = "test-key"
path = "/v1/chat/completions"
model = "test-grader"
temperature = 0.0
timeout_ms = 1000
"#
	);
	let cfg: Config = toml::from_str(&payload).expect("Test config template must parse.");

	hindsight_config::validate(&cfg).expect("Test config template must validate.");

	cfg
}

/// Writes an episode store file into `home_dir`.
pub fn write_episodes(home_dir: &Path, episodes: &[EpisodeSummary]) {
	let payload = serde_json::to_string_pretty(episodes).expect("Episodes must serialize.");

	fs::write(home_dir.join(EPISODES_FILENAME), payload).expect("Episode store must be writable.");
}
