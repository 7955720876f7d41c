use crate::Error;

pub fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() }
}

/// Package managers need root, fail early rather than part way through a procedure.
pub fn ensure_root() -> Result<(), Error> {
    match effective_uid() {
        0 => Ok(()),
        uid => Err(Error::NotRoot(uid)),
    }
}
