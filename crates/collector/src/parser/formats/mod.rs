/// Wrapper grammars that frame a server message inside another log format

pub mod syslog;
pub mod heroku;
