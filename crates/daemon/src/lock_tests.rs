use super::*;

#[test]
fn acquire_release_acquire_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clai.lock");

    let mut guard = LockGuard::acquire(&path).expect("first acquire succeeds");
    guard.release();
    assert!(!path.exists());

    let _guard2 = LockGuard::acquire(&path).expect("re-acquire after release succeeds");
}

#[test]
fn two_consecutive_releases_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clai.lock");

    let mut guard = LockGuard::acquire(&path).unwrap();
    guard.release();
    guard.release();
}

#[test]
fn contended_lock_from_live_holder_fails_with_already_held() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clai.lock");

    let _first = LockGuard::acquire(&path).expect("first acquire succeeds");
    let second = LockGuard::acquire(&path);
    assert!(matches!(second, Err(LockError::AlreadyHeld(pid)) if pid == std::process::id() as i32));
}

#[test]
fn drop_releases_lock_for_next_acquirer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clai.lock");

    {
        let _guard = LockGuard::acquire(&path).unwrap();
    }
    let _guard2 = LockGuard::acquire(&path).expect("lock released on drop");
}

#[test]
fn pid_is_alive_true_for_own_pid() {
    assert!(pid_is_alive(std::process::id() as i32));
}

#[test]
fn pid_is_alive_false_for_implausible_pid() {
    assert!(!pid_is_alive(i32::MAX));
}

#[test]
fn read_held_pid_reflects_holder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clai.lock");

    let _guard = LockGuard::acquire(&path).unwrap();
    assert_eq!(LockGuard::read_held_pid(&path), Some(std::process::id() as i32));
}

#[test]
fn read_held_pid_none_when_unheld() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clai.lock");
    std::fs::write(&path, "12345\n").unwrap();
    assert_eq!(LockGuard::read_held_pid(&path), None);
}
