pub mod check_profile;
pub mod compare;
pub mod summary;
pub mod top;
pub mod util;

pub use check_profile::*;
pub use compare::*;
pub use summary::*;
pub use top::*;
pub use util::*;
