pub(crate) mod file_check;
pub(crate) mod text;
