pub mod letter;
pub mod student;
pub mod word;

pub use letter::LetterBitmap;
pub use student::StudentMetrics;
pub use word::encode_word;
