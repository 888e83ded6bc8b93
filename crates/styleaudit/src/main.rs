fn main() -> anyhow::Result<()> {
    styleaudit::cli::run()
}
