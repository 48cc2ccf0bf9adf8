mod compare;
pub use compare::{Compare, FloatOrder, Greater, Less};

mod key_of_value;
pub use key_of_value::{First, Identity, KeyOfValue};
