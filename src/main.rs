fn main() -> anyhow::Result<()> {
    vpn_inspector_lib::run()
}
