use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{Shell, generate_to};
use console::Term;
use rand::RngCore;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use naclbox::{
    CryptoBox, Error, KEY_LEN, KeyPair, NONCE_LEN, PrivateKey, PublicKey, SecretBox, WireFormat,
    ZERO_BYTES,
};

fn main() -> Result<()> {
    let opts = Opts::parse();

    let level = match opts.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).with_writer(io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set up logging")?;

    match opts.cmd {
        Cmd::Keypair(cmd) => cmd.run(),
        Cmd::PublicKey(cmd) => cmd.run(),
        Cmd::Encrypt(cmd) => cmd.run(),
        Cmd::Decrypt(cmd) => cmd.run(),
        Cmd::Seal(cmd) => cmd.run(),
        Cmd::Open(cmd) => cmd.run(),
        Cmd::Stream(cmd) => cmd.run(),
        Cmd::Complete(cmd) => cmd.run(),
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Opts {
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    cmd: Cmd,
}

trait Runnable {
    fn run(self) -> Result<()>;
}

#[derive(Debug, Subcommand)]
enum Cmd {
    #[command(display_order(1))]
    Keypair(KeypairArgs),
    #[command(display_order(2))]
    PublicKey(PublicKeyArgs),
    #[command(display_order(3))]
    Encrypt(EncryptArgs),
    #[command(display_order(4))]
    Decrypt(DecryptArgs),
    #[command(display_order(5))]
    Seal(SealArgs),
    #[command(display_order(6))]
    Open(OpenArgs),
    #[command(display_order(7))]
    Stream(StreamArgs),
    #[command(display_order(8))]
    Complete(CompleteArgs),
}

/// Generate a new key pair.
///
/// Writes the hex-encoded public key on the first line and the private key on the second.
#[derive(Debug, Parser)]
struct KeypairArgs {
    /// A 32-byte hex seed to XOR into the random private key.
    #[arg(long, value_name = "HEX")]
    seed: Option<String>,

    /// The path to the key pair file or '-' for stdout.
    #[arg(short, long, value_hint = ValueHint::FilePath, default_value = "-")]
    output: PathBuf,
}

impl Runnable for KeypairArgs {
    fn run(self) -> Result<()> {
        let seed = self.seed.as_deref().map(naclbox::from_hex).transpose()?;
        let key_pair = KeyPair::generate(rand::thread_rng(), seed.as_deref())?;
        info!(public_key = %key_pair.public_key, seeded = seed.is_some(), "generated key pair");

        let mut output = open_output(&self.output, false)?;
        writeln!(output, "{}", key_pair.public_key)?;
        writeln!(output, "{}", naclbox::to_hex(key_pair.private_key.as_bytes()))?;
        Ok(())
    }
}

/// Derive a public key from a private key.
#[derive(Debug, Parser)]
struct PublicKeyArgs {
    /// The hex-encoded private key.
    #[arg()]
    private_key: PrivateKey,

    /// The path to the public key file or '-' for stdout.
    #[arg(value_hint = ValueHint::FilePath, default_value = "-")]
    output: PathBuf,
}

impl Runnable for PublicKeyArgs {
    fn run(self) -> Result<()> {
        writeln!(open_output(&self.output, false)?, "{}", self.private_key.public_key())?;
        Ok(())
    }
}

/// Encrypt a message for a receiver.
#[derive(Debug, Parser)]
struct EncryptArgs {
    /// The sender's hex-encoded private key.
    #[arg(long)]
    private_key: PrivateKey,

    /// The receiver's hex-encoded public key.
    #[arg(long)]
    public_key: PublicKey,

    /// The hex-encoded 24-byte nonce. If omitted, a random nonce is printed to stderr.
    #[arg(long, value_name = "HEX", value_parser = parse_nonce)]
    nonce: Option<[u8; NONCE_LEN]>,

    /// Write the zero-padded NaCl wire format.
    #[arg(long)]
    padded: bool,

    /// The path to the input file or '-' for stdin.
    #[arg(value_hint = ValueHint::FilePath)]
    plaintext: PathBuf,

    /// The path to the output file or '-' for stdout.
    #[arg(value_hint = ValueHint::FilePath)]
    ciphertext: PathBuf,
}

impl Runnable for EncryptArgs {
    fn run(self) -> Result<()> {
        let nonce = match self.nonce {
            Some(nonce) => nonce,
            None => {
                let mut nonce = [0u8; NONCE_LEN];
                rand::thread_rng().fill_bytes(&mut nonce);
                Term::stderr().write_line(&naclbox::to_hex(nonce))?;
                nonce
            }
        };

        let crypto_box = CryptoBox::new(&self.private_key, &self.public_key)
            .with_format(wire_format(self.padded));

        let plaintext = read_input(&self.plaintext)?;
        let plaintext =
            if self.padded { [&[0u8; ZERO_BYTES][..], &plaintext[..]].concat() } else { plaintext };
        let ciphertext = crypto_box.encrypt(&plaintext, &nonce)?;
        info!(plaintext_len = plaintext.len(), ciphertext_len = ciphertext.len(), "encrypted");

        open_output(&self.ciphertext, true)?.write_all(&ciphertext)?;
        Ok(())
    }
}

/// Decrypt and verify a message.
#[derive(Debug, Parser)]
struct DecryptArgs {
    /// The receiver's hex-encoded private key.
    #[arg(long)]
    private_key: PrivateKey,

    /// The sender's hex-encoded public key.
    #[arg(long)]
    public_key: PublicKey,

    /// The hex-encoded 24-byte nonce.
    #[arg(long, value_name = "HEX", value_parser = parse_nonce)]
    nonce: [u8; NONCE_LEN],

    /// Read the zero-padded NaCl wire format.
    #[arg(long)]
    padded: bool,

    /// The path to the input file or '-' for stdin.
    #[arg(value_hint = ValueHint::FilePath)]
    ciphertext: PathBuf,

    /// The path to the output file or '-' for stdout.
    #[arg(value_hint = ValueHint::FilePath)]
    plaintext: PathBuf,
}

impl Runnable for DecryptArgs {
    fn run(self) -> Result<()> {
        let crypto_box = CryptoBox::new(&self.private_key, &self.public_key)
            .with_format(wire_format(self.padded));

        let ciphertext = read_input(&self.ciphertext)?;
        let plaintext = crypto_box.decrypt(&ciphertext, &self.nonce)?;
        let plaintext = if self.padded { &plaintext[ZERO_BYTES..] } else { &plaintext[..] };
        info!(ciphertext_len = ciphertext.len(), plaintext_len = plaintext.len(), "decrypted");

        open_output(&self.plaintext, true)?.write_all(plaintext)?;
        Ok(())
    }
}

/// Encrypt a message with a symmetric key.
#[derive(Debug, Parser)]
struct SealArgs {
    /// The hex-encoded 32-byte key.
    #[arg(long, value_name = "HEX", value_parser = parse_key)]
    key: [u8; KEY_LEN],

    /// The hex-encoded 24-byte nonce.
    #[arg(long, value_name = "HEX", value_parser = parse_nonce)]
    nonce: [u8; NONCE_LEN],

    /// The path to the input file or '-' for stdin.
    #[arg(value_hint = ValueHint::FilePath)]
    plaintext: PathBuf,

    /// The path to the output file or '-' for stdout.
    #[arg(value_hint = ValueHint::FilePath)]
    ciphertext: PathBuf,
}

impl Runnable for SealArgs {
    fn run(self) -> Result<()> {
        let plaintext = read_input(&self.plaintext)?;
        let ciphertext = SecretBox::new(self.key)?.seal(&plaintext, &self.nonce)?;
        info!(plaintext_len = plaintext.len(), ciphertext_len = ciphertext.len(), "sealed");

        open_output(&self.ciphertext, true)?.write_all(&ciphertext)?;
        Ok(())
    }
}

/// Decrypt and verify a message with a symmetric key.
#[derive(Debug, Parser)]
struct OpenArgs {
    /// The hex-encoded 32-byte key.
    #[arg(long, value_name = "HEX", value_parser = parse_key)]
    key: [u8; KEY_LEN],

    /// The hex-encoded 24-byte nonce.
    #[arg(long, value_name = "HEX", value_parser = parse_nonce)]
    nonce: [u8; NONCE_LEN],

    /// The path to the input file or '-' for stdin.
    #[arg(value_hint = ValueHint::FilePath)]
    ciphertext: PathBuf,

    /// The path to the output file or '-' for stdout.
    #[arg(value_hint = ValueHint::FilePath)]
    plaintext: PathBuf,
}

impl Runnable for OpenArgs {
    fn run(self) -> Result<()> {
        let ciphertext = read_input(&self.ciphertext)?;
        let plaintext = SecretBox::new(self.key)?.open(&ciphertext, &self.nonce)?;
        info!(ciphertext_len = ciphertext.len(), plaintext_len = plaintext.len(), "opened");

        open_output(&self.plaintext, true)?.write_all(&plaintext)?;
        Ok(())
    }
}

/// XOR a file with the raw XSalsa20 keystream. Provides no authentication.
#[derive(Debug, Parser)]
struct StreamArgs {
    /// The hex-encoded 32-byte key.
    #[arg(long, value_name = "HEX", value_parser = parse_key)]
    key: [u8; KEY_LEN],

    /// The hex-encoded 24-byte nonce.
    #[arg(long, value_name = "HEX", value_parser = parse_nonce)]
    nonce: [u8; NONCE_LEN],

    /// The path to the input file or '-' for stdin.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// The path to the output file or '-' for stdout.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

impl Runnable for StreamArgs {
    fn run(self) -> Result<()> {
        let input = read_input(&self.input)?;
        let output = naclbox::stream_xor(&input, &self.nonce, &self.key)?;
        info!(len = output.len(), "applied keystream");

        open_output(&self.output, true)?.write_all(&output)?;
        Ok(())
    }
}

/// Generate shell completion scripts.
#[derive(Debug, Parser)]
#[command(hide(true))]
struct CompleteArgs {
    /// The type of shell completion script to generate: bash, elvish, fish, powershell, or zsh.
    #[arg()]
    shell: Shell,

    /// Output directory for shell completion scripts.
    #[arg(value_hint = ValueHint::DirPath)]
    output: PathBuf,
}

impl Runnable for CompleteArgs {
    fn run(self) -> Result<()> {
        let mut app = Opts::command();
        let path = generate_to(self.shell, &mut app, "naclbox", &self.output)?;
        debug!(?path, "wrote completion script");
        Ok(())
    }
}

const fn wire_format(padded: bool) -> WireFormat {
    if padded { WireFormat::Padded } else { WireFormat::Compact }
}

fn parse_key(s: &str) -> Result<[u8; KEY_LEN], Error> {
    let b = naclbox::from_hex(s)?;
    <[u8; KEY_LEN]>::try_from(b.as_slice()).map_err(|_| Error::InvalidKeyLength(b.len()))
}

fn parse_nonce(s: &str) -> Result<[u8; NONCE_LEN], Error> {
    let b = naclbox::from_hex(s)?;
    <[u8; NONCE_LEN]>::try_from(b.as_slice()).map_err(|_| Error::InvalidNonceLength(b.len()))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut input = open_input(path)?;
    let mut buf = Vec::new();
    input.read_to_end(&mut buf).with_context(|| format!("failed to read {path:?}"))?;
    debug!(?path, len = buf.len(), "read input");
    Ok(buf)
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        if io::stdin().is_terminal() {
            bail!("stdin is a tty");
        }
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(path).with_context(|| format!("failed to open {path:?}"))?))
    }
}

fn open_output(path: &Path, binary: bool) -> Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        if binary && io::stdout().is_terminal() {
            bail!("stdout is a tty");
        }
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(File::create(path).with_context(|| format!("failed to create {path:?}"))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_validity() {
        Opts::command().debug_assert();
    }

    #[test]
    fn hex_arguments() {
        assert!(parse_key(&"00".repeat(KEY_LEN)).is_ok());
        assert!(matches!(parse_key("0011"), Err(Error::InvalidKeyLength(2))));
        assert!(matches!(parse_nonce(&"00".repeat(25)), Err(Error::InvalidNonceLength(25))));
        assert!(matches!(parse_nonce("xyz"), Err(Error::InvalidEncoding(_))));
    }
}
