use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestrionError {
    #[error("failed to spawn the {name} delivery thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}
