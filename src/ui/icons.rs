pub struct Icons;

impl Icons {
    pub const INDEX: &str = "🗂️";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const STATS: &str = "📊";
    pub const NEW: &str = "✨";
    pub const MOD: &str = "📝";
    pub const DEL: &str = "🗑️";
    pub const PACKAGE: &str = "📦";
    pub const DATABASE: &str = "🗄️";
}
