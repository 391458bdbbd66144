use bytes::Buf;
use dynbuf_error::dynbuf_panic;

use crate::Buffer;

impl Buf for Buffer {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.as_slice()
    }

    fn advance(&mut self, cnt: usize) {
        if cnt > self.len() {
            dynbuf_panic!(OutOfBounds: cnt, 0, self.len());
        }
        self.skip(cnt);
    }
}
