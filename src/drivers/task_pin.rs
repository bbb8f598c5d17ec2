//! Core-pinned thread spawning for the ESP32-S3 dual core.
//!
//! ESP-IDF implements `std::thread` over pthreads, which wrap FreeRTOS
//! tasks. `esp_pthread_set_cfg()` stages per-thread configuration that
//! applies to the *next* `pthread_create()` from the calling thread, so
//! the config→spawn pair must not interleave with other spawns on the
//! same thread. On non-ESP targets only the stack size is honored.

/// CPU core identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — WiFi/mesh protocol stacks live here.
    Pro = 0,
    /// Core 1 (APP_CPU) — application tasks, including the sensor
    /// pipeline.
    App = 1,
}

/// Spawn a thread pinned to `core` with the given FreeRTOS priority and
/// stack size.
#[cfg(target_os = "espidf")]
pub fn spawn_pinned(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &str,
    f: impl FnOnce() + Send + 'static,
) -> std::thread::JoinHandle<()> {
    let c_name = std::ffi::CString::new(name).expect("thread name contains NUL");
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = i32::from(priority);
        cfg.stack_size = (stack_kb * 1024) as i32;
        cfg.thread_name = c_name.as_ptr();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        assert!(
            ret == esp_idf_sys::ESP_OK as i32,
            "esp_pthread_set_cfg failed: {ret}"
        );
    }

    log::info!("spawning '{name}' on {core:?} (pri={priority}, stack={stack_kb}KB)");

    std::thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .expect("spawn_pinned: thread creation failed")
}

/// Host fallback — no core affinity or priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_pinned(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &str,
    f: impl FnOnce() + Send + 'static,
) -> std::thread::JoinHandle<()> {
    log::info!("spawning '{name}' (host, no core pinning, stack={stack_kb}KB)");

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .expect("spawn_pinned: thread creation failed")
}
