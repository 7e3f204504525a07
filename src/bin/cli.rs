//! scull CLI Client
//!
//! Command-line interface for a running scull server.

use clap::{Parser, Subcommand};
use scull::client::Client;
use scull::{OpenMode, Whence};

/// scull CLI
#[derive(Parser, Debug)]
#[command(name = "scull-cli")]
#[command(about = "CLI for the scull device server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write text at an offset (opens read-write, keeps prior contents)
    Write {
        /// Byte offset to write at
        offset: u64,

        /// Text to write
        text: String,
    },

    /// Replace the device contents with text (write-only open trims)
    Put {
        /// Text to write
        text: String,
    },

    /// Read bytes starting at an offset
    Read {
        /// Byte offset to read from
        offset: u64,

        /// Number of bytes to read
        len: usize,
    },

    /// Print the device size and geometry
    Size,

    /// Discard the device contents
    Trim,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> scull::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Write { offset, text } => {
            let handle = client.open(OpenMode::ReadWrite)?;
            client.seek(handle, to_offset(offset)?, Whence::Set)?;
            client.write_all(handle, text.as_bytes())?;
            client.release(handle)?;
            println!("wrote {} bytes at {}", text.len(), offset);
        }
        Commands::Put { text } => {
            let handle = client.open(OpenMode::WriteOnly)?;
            client.write_all(handle, text.as_bytes())?;
            client.release(handle)?;
            println!("wrote {} bytes", text.len());
        }
        Commands::Read { offset, len } => {
            let handle = client.open(OpenMode::ReadOnly)?;
            client.seek(handle, to_offset(offset)?, Whence::Set)?;
            let data = client.read_up_to(handle, len)?;
            client.release(handle)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        Commands::Size => {
            let stat = client.stat()?;
            println!(
                "size={} quantum={} qset={}",
                stat.size, stat.quantum_size, stat.qset_size
            );
        }
        Commands::Trim => {
            let handle = client.open(OpenMode::WriteOnly)?;
            client.release(handle)?;
            println!("trimmed");
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn to_offset(offset: u64) -> scull::Result<i64> {
    i64::try_from(offset)
        .map_err(|_| scull::ScullError::InvalidArgument(format!("offset {} too large", offset)))
}
