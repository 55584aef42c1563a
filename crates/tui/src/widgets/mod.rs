mod input;
mod stateful_list;

pub use input::TextInput;
pub use stateful_list::StatefulList;
