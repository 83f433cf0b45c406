#[cfg(test)]
pub mod test {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use crate::config::Config;

    /// Cloneable in-memory sink, so a test can keep a handle on what a
    /// `Config` writes to its output.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Empty schema with a program description, so `check_format` reports
    /// nothing about the program itself.
    pub fn quiet_config() -> Config {
        let mut config = Config::new();
        config.description("A test program");
        config
    }

    // -- Fixture shared by parse, file and output tests -------------------------

    /// count (Int 1, -c), name (required, -n), ratio (Number 0.5, -r) and
    /// verbose (Bool false, -v).
    pub fn sample_config() -> Config {
        let mut config = Config::new();
        config.description("A sample program");
        config
            .option("count")
            .shortflag("c")
            .description("How many times to run")
            .default_value(1);
        config
            .option("name")
            .shortflag("n")
            .description("Who to greet")
            .required(true);
        config
            .option("ratio")
            .shortflag("r")
            .description("Blend ratio")
            .default_value(0.5);
        config
            .option("verbose")
            .shortflag("v")
            .description("Print more")
            .default_value(false);
        config
    }

    #[test]
    fn sample_config_schema_is_clean() {
        let mut config = sample_config();
        assert_eq!(config.check_format(), crate::types::LogLevel::Info);
    }

    #[test]
    fn shared_buffer_collects_writes() {
        let buf = SharedBuffer::default();
        let mut handle = buf.clone();
        write!(handle, "hello ").unwrap();
        write!(handle, "world").unwrap();
        assert_eq!(buf.contents(), "hello world");
    }
}
