// Simcheck: similarity checking for assignment submissions
//
// This is the library root. `similarity` is the pure scoring engine;
// `workflow` wires it to storage through collaborator traits; `db` is the
// SQLite backend; `output` renders results for the terminal.

pub mod config;
pub mod db;
pub mod output;
pub mod similarity;
pub mod workflow;
