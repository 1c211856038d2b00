//! End-to-end checks against real sockets on the loopback interface.
//!
//! Nothing here needs root or outside connectivity. The ICMP path is covered
//! by the ignored tests in `reachr-core`.

#[cfg(test)]
mod support;

#[cfg(test)]
mod probe {
    mod integration;
}

#[cfg(test)]
mod winrm {
    mod integration;
}
