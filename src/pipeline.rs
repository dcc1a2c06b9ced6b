//! # 载荷前后处理
//!
//! 可选的压缩与认证加密阶段。它们只变换载荷字节，在隐藏之前
//! (压缩 → 加密) 和恢复之后 (解密 → 解压) 执行，从不接触图像。

use std::io::{Read, Write};

use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use anyhow::{Context, Result, anyhow, ensure};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;
use zeroize::Zeroizing;

/// AES-GCM-SIV 随机数长度 (96 bits)，以明文形式置于密文之前。
pub const NONCE_LEN: usize = 12;

/// 由口令派生的 AES-256 密钥。
pub struct Cipher {
    key: Zeroizing<[u8; 32]>,
}

impl Cipher {
    /// 以口令的 SHA-256 摘要作为密钥。
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
        Self { key }
    }

    fn aead(&self) -> Result<Aes256GcmSiv> {
        Aes256GcmSiv::new_from_slice(self.key.as_slice()).map_err(|_| anyhow!("invalid key length"))
    }

    /// 加密并在结果前附加随机数。
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let sealed = self
            .aead()?
            .encrypt(Nonce::from_slice(&nonce), data)
            .map_err(|_| anyhow!("encryption failed"))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);

        info!("{} bytes encrypted to {} bytes", data.len(), out.len());
        Ok(out)
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        ensure!(
            data.len() >= NONCE_LEN,
            "Encrypted data is only {} bytes, shorter than its {}-byte nonce.",
            data.len(),
            NONCE_LEN
        );
        let (nonce, sealed) = data.split_at(NONCE_LEN);

        let plain = self
            .aead()?
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| anyhow!("Decryption failed. The key may be wrong or the data corrupted."))?;

        info!("{} bytes decrypted to {} bytes", data.len(), plain.len());
        Ok(plain)
    }
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).context("zlib compression failed")?;
    let out = encoder.finish().context("zlib compression failed")?;

    info!("{} bytes compressed to {} bytes", data.len(), out.len());
    Ok(out)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .context("zlib decompression failed. The data may not be compressed.")?;

    info!("{} bytes decompressed to {} bytes", data.len(), out.len());
    Ok(out)
}

/// 载荷处理流程的配置。
#[derive(Default)]
pub struct Pipeline {
    zip: bool,
    cipher: Option<Cipher>,
}

impl Pipeline {
    pub fn new(zip: bool, key: Option<&str>) -> Self {
        Self {
            zip,
            cipher: key.map(Cipher::from_passphrase),
        }
    }

    /// 隐藏之前：压缩，然后加密。
    pub fn seal(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let data = if self.zip { compress(&data)? } else { data };
        match &self.cipher {
            Some(cipher) => cipher.encrypt(&data),
            None => Ok(data),
        }
    }

    /// 恢复之后：解密，然后解压。
    pub fn open(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let data = match &self.cipher {
            Some(cipher) => cipher.decrypt(&data)?,
            None => data,
        };
        if self.zip { decompress(&data) } else { Ok(data) }
    }
}
