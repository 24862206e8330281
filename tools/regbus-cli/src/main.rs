//! Command-line access to I2C device registers.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use regbus::tracing::prelude::*;
use regbus::{BusConfig, I2cBus, RegisterAddress};

/// Read and write I2C device registers through /dev/i2c-N
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// I2C adapter index (default: REGBUS_I2C_DEVICE or 1)
    #[arg(short = 'b', long)]
    bus: Option<u32>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read bytes from a device, optionally starting at a register
    Read {
        #[command(flatten)]
        target: Target,

        /// Number of bytes to read (register reads only)
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Write bytes to a device, optionally starting at a register
    Write {
        #[command(flatten)]
        target: Target,

        /// Bytes to write, e.g. 0xab 12 0x3
        #[arg(required = true, value_parser = parse_u8)]
        data: Vec<u8>,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Slave address, e.g. 0x50
    #[arg(short = 's', long, value_parser = parse_u16)]
    slave: u16,

    /// Register address
    #[arg(short = 'r', long, value_parser = parse_u16)]
    register: Option<u16>,

    /// Use 16-bit register addressing
    #[arg(short = 'w', long)]
    wide: bool,
}

impl Target {
    fn register(&self) -> Result<Option<RegisterAddress>> {
        let Some(address) = self.register else {
            return Ok(None);
        };
        if self.wide {
            return Ok(Some(RegisterAddress::bits16(address)));
        }
        match u8::try_from(address) {
            Ok(address) => Ok(Some(RegisterAddress::bits8(address))),
            Err(_) => bail!("register 0x{:04x} needs --wide", address),
        }
    }
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let value = parse_u16(s)?;
    u8::try_from(value).map_err(|_| format!("byte out of range: {}", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        std::env::set_var("RUST_LOG", "regbus=trace,regbus_cli=debug");
    }
    regbus::tracing::init_journald_or_stderr();

    let config = match cli.bus {
        Some(index) => BusConfig {
            device_index: index,
            ..BusConfig::from_env()
        },
        None => BusConfig::from_env(),
    };
    let path = config.device_path();
    debug!(path = %path.display(), "Using I2C adapter");

    let mut bus = I2cBus::open_config(&config)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let outcome = run(&mut bus, &cli.command);
    let closed = bus.close().context("Failed to close I2C adapter");
    outcome?;
    closed
}

fn run(bus: &mut I2cBus, command: &Command) -> Result<()> {
    match command {
        Command::Read { target, count } => {
            let data = match target.register()? {
                Some(register) => bus
                    .read_register_bytes(target.slave, register, *count)
                    .with_context(|| format!("Failed to read register {}", register))?,
                None => {
                    if *count != 1 {
                        bail!("Reads without a register return exactly one byte");
                    }
                    vec![bus.read_byte(target.slave).context("Failed to read byte")?]
                }
            };
            println!("{}", hex::encode(&data));
        }
        Command::Write { target, data } => match target.register()? {
            Some(register) => bus
                .write_register_bytes(target.slave, register, data)
                .with_context(|| format!("Failed to write register {}", register))?,
            None => {
                let [byte] = data.as_slice() else {
                    bail!("Writes without a register take exactly one byte");
                };
                bus.write_byte(target.slave, *byte)
                    .context("Failed to write byte")?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_u16("0x50"), Ok(0x50));
        assert_eq!(parse_u16("0X1234"), Ok(0x1234));
        assert_eq!(parse_u16("80"), Ok(80));
        assert!(parse_u16("0xzz").is_err());
        assert_eq!(parse_u8("0xab"), Ok(0xab));
        assert!(parse_u8("0x100").is_err());
    }

    #[test]
    fn read_register_args() {
        let cli = Cli::try_parse_from([
            "regbus", "-b", "2", "read", "-s", "0x50", "-r", "0x1234", "-w", "-n", "3",
        ])
        .unwrap();
        assert_eq!(cli.bus, Some(2));
        let Command::Read { target, count } = cli.command else {
            panic!("expected read command");
        };
        assert_eq!(count, 3);
        assert_eq!(target.slave, 0x50);
        assert_eq!(
            target.register().unwrap(),
            Some(RegisterAddress::bits16(0x1234))
        );
    }

    #[test]
    fn write_requires_data() {
        assert!(Cli::try_parse_from(["regbus", "write", "-s", "0x50"]).is_err());

        let cli =
            Cli::try_parse_from(["regbus", "write", "-s", "0x50", "-r", "0x10", "0xab"]).unwrap();
        let Command::Write { target, data } = cli.command else {
            panic!("expected write command");
        };
        assert_eq!(data, [0xab]);
        assert_eq!(
            target.register().unwrap(),
            Some(RegisterAddress::bits8(0x10))
        );
    }

    #[test]
    fn wide_register_requires_wide_flag() {
        let cli =
            Cli::try_parse_from(["regbus", "write", "-s", "0x50", "-r", "0x1234", "0xab"]).unwrap();
        let Command::Write { target, .. } = cli.command else {
            panic!("expected write command");
        };
        let err = target.register().unwrap_err();
        assert_eq!(err.to_string(), "register 0x1234 needs --wide");

        let cli = Cli::try_parse_from([
            "regbus", "write", "-s", "0x50", "-r", "0x1234", "-w", "0xab",
        ])
        .unwrap();
        let Command::Write { target, .. } = cli.command else {
            panic!("expected write command");
        };
        assert_eq!(target.register().unwrap().unwrap().to_bytes(), [0x12, 0x34]);
    }
}
