pub mod account;
pub mod chat;
pub mod enums;
pub mod feedback;
pub mod letter;

pub use account::*;
pub use chat::*;
pub use enums::*;
pub use feedback::*;
pub use letter::*;
