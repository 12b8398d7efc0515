use crate::prelude::StageError;

/// Bounded pool of zeroed `f32` map buffers reused across heatmap runs.
pub struct BufferPool {
    buffers: Vec<Vec<f32>>,
    max_capacity: usize,
    outstanding: usize,
}

impl BufferPool {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            max_capacity,
            outstanding: 0,
        }
    }

    /// Hands out a zero-filled buffer of `length`, reusing a released one if possible.
    pub fn checkout(&mut self, length: usize) -> Result<Vec<f32>, StageError> {
        if self.outstanding >= self.max_capacity {
            return Err(StageError::BufferExhaustion(format!(
                "all {} map buffers in use",
                self.max_capacity
            )));
        }
        let mut buffer = self.buffers.pop().unwrap_or_default();
        buffer.clear();
        buffer.resize(length, 0.0);
        self.outstanding += 1;
        Ok(buffer)
    }

    /// Returns a buffer so the next checkout can reuse its allocation.
    pub fn release(&mut self, buffer: Vec<f32>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }

    /// Forgets a buffer that left the stage inside its output.
    pub fn detach(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.buffers.clear();
        self.outstanding = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_refuses_checkout_past_capacity() {
        let mut pool = BufferPool::with_capacity(1);
        let first = pool.checkout(4).unwrap();
        assert!(matches!(
            pool.checkout(4),
            Err(StageError::BufferExhaustion(_))
        ));
        pool.release(first);
        assert_eq!(pool.checkout(4).unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn released_buffers_come_back_zeroed() {
        let mut pool = BufferPool::with_capacity(2);
        let mut buffer = pool.checkout(3).unwrap();
        buffer[1] = 9.0;
        pool.release(buffer);
        assert_eq!(pool.checkout(5).unwrap(), vec![0.0; 5]);
    }
}
