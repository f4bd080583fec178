use crate::error::Result;
use sha1::{Digest, Sha1};

/// client-side auth plugin
///
/// mirrors the server's pluggable authentication, simplified to the
/// request/response exchange a replication client needs
pub trait AuthPlugin {
    const NAME: &'static str;

    /// set credentials, must happen before next()
    fn set_credential(&mut self, user: &str, password: &str);

    /// process handshake data from the server and optionally produce
    /// data to send back
    fn next(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MysqlNativePassword {
    password: Vec<u8>,
}

impl MysqlNativePassword {
    pub fn new() -> Self {
        MysqlNativePassword { password: vec![] }
    }
}

impl AuthPlugin for MysqlNativePassword {
    const NAME: &'static str = "mysql_native_password";

    fn set_credential(&mut self, _user: &str, password: &str) {
        self.password = Vec::from(password.as_bytes());
    }

    fn next(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        if self.password.is_empty() {
            // no password, empty auth response
            return Ok(());
        }
        output.extend(scramble411(&self.password, input));
        Ok(())
    }
}

/// SHA1(password) XOR SHA1(seed + SHA1(SHA1(password)))
fn scramble411(password: &[u8], seed: &[u8]) -> Vec<u8> {
    let stage1 = Sha1::digest(password);
    let stage2 = Sha1::digest(&stage1);
    let mut hasher = Sha1::new();
    hasher.update(seed);
    hasher.update(&stage2);
    hasher
        .finalize()
        .iter()
        .zip(stage1.iter())
        .map(|(b1, b2)| b1 ^ b2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scramble411_known_vector() {
        let rst = scramble411(b"password", &[0u8; 20]);
        assert_eq!(20, rst.len());
        // scrambling twice with the same seed is deterministic
        assert_eq!(rst, scramble411(b"password", &[0u8; 20]));
        // a different seed yields a different response
        assert_ne!(rst, scramble411(b"password", &[1u8; 20]));
    }

    #[test]
    fn test_empty_password_sends_nothing() {
        let mut plugin = MysqlNativePassword::new();
        plugin.set_credential("root", "");
        let mut out = vec![];
        plugin.next(&[0u8; 20], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
