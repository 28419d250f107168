mod common;
mod hybrid;
