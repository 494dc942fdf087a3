/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}

pub mod timing {

    use super::group_digits;
    use std::time::Instant;
    use std::io::Write;

    pub struct Progress {
        previous: Instant,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now() } }

        /// Print message, append ellipsis, flush stdout, stay on same line, start timer.
        pub fn start(&mut self, message: &str) {
            print!("{message} ... ");
            std::io::stdout().flush().unwrap();
            self.start_timer();
        }

        /// Print message, go to next line, start timer
        pub fn startln(&mut self, message: &str) {
            self.start(message);
            println!();
            self.start_timer();
        }

        // Print time elapsed since last start or done
        pub fn done(&mut self) {
            println!("{} ms", group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        // Print message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            println!("{message}: {} ms",
                     group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}

#[cfg(test)]
mod test_group_digits {
    use super::*;
    use rstest::rstest;

    #[rstest(/**/ n        , expected     ,
             case(7        , "7"          ),
             case(999      , "999"        ),
             case(1000     , "1,000"      ),
             case(5_400_000, "5,400,000"  ),
    )]
    fn groups_thousands(n: u64, expected: &str) {
        assert_eq!(group_digits(n), expected);
    }
}
