fn main() -> anyhow::Result<()> {
    coinwatch_lib::run()
}
