//! Shim dispatch behavior around the global table: null table, missing
//! slots, and slot forwarding. Serialized because the table pointer is
//! process-global.

use serial_test::serial;
use skellig_abi::*;
use std::ptr;

fn clear_table() {
    skellig_shim::skellig_set_functions(ptr::null());
}

#[test]
#[serial]
fn test_null_table_fails_producers() {
    clear_table();
    let mut out = ptr::null_mut();
    let status = unsafe { skellig_shim::napi_create_object(1 as napi_env, &mut out) };
    assert_eq!(status, napi_generic_failure);

    let status = unsafe { skellig_shim::napi_get_undefined(1 as napi_env, &mut out) };
    assert_eq!(status, napi_generic_failure);
}

#[test]
#[serial]
fn test_missing_query_slots_answer_defaults() {
    // A table with no slots at all: queries degrade, producers fail.
    static EMPTY: once_table::Holder = once_table::Holder::new();
    skellig_shim::skellig_set_functions(once_table::empty(&EMPTY));

    let mut pending = true;
    let status =
        unsafe { skellig_shim::napi_is_exception_pending(1 as napi_env, &mut pending) };
    assert_eq!(status, napi_ok);
    assert!(!pending);

    let mut is_array = true;
    let status = unsafe { skellig_shim::napi_is_array(1 as napi_env, ptr::null_mut(), &mut is_array) };
    assert_eq!(status, napi_ok);
    assert!(!is_array);

    let mut names = 7 as napi_value;
    let status = unsafe {
        skellig_shim::napi_get_property_names(1 as napi_env, ptr::null_mut(), &mut names)
    };
    assert_eq!(status, napi_ok);
    assert!(names.is_null());

    let mut out = ptr::null_mut();
    let status = unsafe { skellig_shim::napi_create_object(1 as napi_env, &mut out) };
    assert_eq!(status, napi_generic_failure);

    // Semantics-free symbols still report success with no slot.
    let status = unsafe {
        skellig_shim::napi_add_env_cleanup_hook(1 as napi_env, None, ptr::null_mut())
    };
    assert_eq!(status, napi_ok);

    clear_table();
}

#[test]
#[serial]
fn test_present_slot_is_forwarded() {
    unsafe extern "C" fn fake_get_version(_env: napi_env, result: *mut u32) -> napi_status {
        unsafe { *result = 1234 };
        napi_ok
    }

    static WITH_VERSION: once_table::Holder = once_table::Holder::new();
    let table = once_table::empty_mut(&WITH_VERSION);
    // SAFETY: single-threaded under #[serial]; the holder outlives the
    // install.
    unsafe {
        (*table).napi_get_version = Some(fake_get_version);
    }
    skellig_shim::skellig_set_functions(table);

    let mut version = 0u32;
    let status = unsafe { skellig_shim::napi_get_version(1 as napi_env, &mut version) };
    assert_eq!(status, napi_ok);
    assert_eq!(version, 1234);

    clear_table();
}

/// Leaky static storage for test tables; the shim requires installed
/// pointers to live for the rest of the process.
mod once_table {
    use skellig_abi::NapiFunctions;
    use std::sync::OnceLock;

    pub struct Holder(OnceLock<usize>);

    impl Holder {
        pub const fn new() -> Self {
            Self(OnceLock::new())
        }
    }

    pub fn empty(holder: &'static Holder) -> *const NapiFunctions {
        empty_mut(holder).cast_const()
    }

    pub fn empty_mut(holder: &'static Holder) -> *mut NapiFunctions {
        let address = *holder
            .0
            .get_or_init(|| Box::into_raw(Box::new(NapiFunctions::default())) as usize);
        address as *mut NapiFunctions
    }
}
