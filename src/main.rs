fn main() -> anyhow::Result<()> {
    chat_agent::run()
}
