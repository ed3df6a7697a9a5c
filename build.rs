fn main() {
    // ESP-IDF linker/env plumbing; host-target builds skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
