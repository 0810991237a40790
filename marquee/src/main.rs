use clap::Parser;
use eyre::Result;
use marquee::command::MarqueeCmd;
use marquee::VERSION;

#[derive(Parser)]
#[command(
    author = "Sam Uherek",
    version = VERSION,
    )]
struct Marquee {
    #[command(subcommand)]
    marquee: MarqueeCmd,
}

impl Marquee {
    fn run(self) -> Result<()> {
        self.marquee.run()
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    Marquee::parse().run()
}
