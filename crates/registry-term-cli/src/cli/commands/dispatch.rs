use super::super::args::*;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Decode(args) => super::decode::run(args),
        Command::Encode(args) => super::encode::run(args),
        Command::Report(args) => super::report::run(args),
    }
}
