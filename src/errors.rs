// Operator-facing error messages
//
// Helpers that turn low-level failures into messages naming a fix.

use std::path::Path;

/// Format a "sweep already running" lock error
pub fn sweep_lock_held_error(lock_path: &Path) -> String {
    format!(
        "Another sweep is already running against this pointer file\n\n\
        Lock held: {}\n\n\
        Running two sweeps against the same checkpoint slot would corrupt\n\
        the pointer state. Wait for the other run to finish, or remove the\n\
        lock file if you are certain no other sweep is alive.",
        lock_path.display()
    )
}

/// Format a trainer-spawn error with the attempted command line
pub fn trainer_not_found_error(command_line: &str) -> String {
    format!(
        "Could not start the trainer process\n\n\
        Command: {}\n\n\
        Check that the program exists and is on PATH, or set\n\
        [trainer] program in ckpt-sweep.toml.",
        command_line
    )
}
