pub mod origins;
pub mod overlay;
pub mod results;

pub use origins::*;
pub use overlay::*;
pub use results::*;
