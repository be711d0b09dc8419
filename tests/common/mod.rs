#![allow(dead_code)]

pub mod command;
pub mod file;

/// Pull the 40-character id out of a command's stdout
pub fn parse_oid(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout).trim().to_string()
}
