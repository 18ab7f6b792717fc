pub mod db;
pub mod knowledge_base;

// Re-export commonly used items
pub use db::{load_table, parse_table, read_table, CRASH_REASONS_FILE, DETECTION_RULES_FILE, PERSONS_FILE};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseReader, KnowledgeBaseStats};
