use color_eyre::Result;
use volcano_globe::start;

fn main() -> Result<()> {
    start()
}
