use spinroom_core::storage::Database;

pub fn run(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let spins = db.recent_spins(limit)?;
    println!("{}", serde_json::to_string_pretty(&spins)?);
    Ok(())
}

pub fn stats() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let stats = db.spin_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
