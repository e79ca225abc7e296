pub mod director;
pub mod runtime;
pub mod server;
