//! Output sinks for a finished harvest.
//!
//! Two kinds of output leave a run:
//!
//! - [`table`]: the record list as a spreadsheet-style CSV file
//! - [`images`]: per-record thumbnail downloads, requested by the walker as
//!   it emits each record
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── fresh_news.csv
//! ├── NewsImagePG1P1.jpg
//! ├── NewsImagePG1P2.png
//! └── ...
//! ```

pub mod images;
pub mod table;
