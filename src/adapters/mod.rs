// Adapters layer: concrete collaborators for the outside world (http, storage, terminal, files).

pub mod export;
pub mod http;
pub mod render;
pub mod storage;
