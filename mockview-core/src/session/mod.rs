mod registry;
mod session;

pub use registry::SessionRegistry;
pub use session::Session;
