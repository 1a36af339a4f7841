mod grant;
mod location;
mod session;

pub use grant::*;
pub use location::*;
pub use session::*;
