mod initial_paternity;
mod io_utils;
mod math;
mod readers;
mod util;

pub use initial_paternity::InitialPaternity;
pub use io_utils::create_writer;
pub use math::{ln_sum_exp, sample_index, sample_log_index};
pub use readers::open_input_reader;
pub use util::{handle_error_and_exit, Result};
