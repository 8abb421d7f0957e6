mod message;
mod todo;

pub use message::Message;
pub use todo::Todo;
