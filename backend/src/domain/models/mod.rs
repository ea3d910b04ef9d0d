pub mod feeding;
pub mod stored;

pub use feeding::*;
pub use stored::*;
