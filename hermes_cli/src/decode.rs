use clap::Args;
use hermes_navigation::polyline;

#[derive(Args)]
pub struct DecodeArgs {
    /// The encoded polyline
    polyline: String,

    /// Number of decimal digits kept by the encoder
    #[arg(long, short = 'p', default_value_t = polyline::DEFAULT_PRECISION)]
    precision: u32,
}

pub fn run(args: DecodeArgs) -> anyhow::Result<()> {
    let coordinates = polyline::decode_with_precision(&args.polyline, args.precision)?;

    println!("{}", serde_json::to_string_pretty(&coordinates)?);

    Ok(())
}
