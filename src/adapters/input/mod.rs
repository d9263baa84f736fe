//! Input Adapters - loading review batches from outside the process.

mod review_file;

pub use review_file::{input_path_from_args, load_reviews, parse_reviews, ReviewFileError};
