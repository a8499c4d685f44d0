use candle_core::{error::Result, DType, Device, IndexOp, Tensor};
use soncoord_core::replay_buffer::BatchBase;

/// Adds capability of constructing [`Tensor`] with a static method.
///
/// [`Tensor`]: https://docs.rs/candle-core/0.8.4/candle_core/struct.Tensor.html
pub trait ZeroTensor {
    /// Constructs zero tensor.
    fn zeros(shape: &[usize]) -> Result<Tensor>;
}

impl ZeroTensor for f32 {
    fn zeros(shape: &[usize]) -> Result<Tensor> {
        Tensor::zeros(shape, DType::F32, &Device::Cpu)
    }
}

impl ZeroTensor for i64 {
    fn zeros(shape: &[usize]) -> Result<Tensor> {
        Tensor::zeros(shape, DType::I64, &Device::Cpu)
    }
}

/// A buffer of tensors used as a storage slot of a replay buffer.
///
/// The internal buffer has the shape `[capacity, ..]` and is lazily
/// allocated on the first push, from which the trailing dimensions and the
/// dtype are taken.
#[derive(Clone, Debug)]
pub struct TensorBatch {
    buf: Option<Tensor>,
    capacity: usize,
}

impl TensorBatch {
    /// Wraps a tensor whose first dimension is the batch dimension.
    pub fn from_tensor(t: Tensor) -> Self {
        let capacity = t.dims()[0] as _;
        Self {
            buf: Some(t),
            capacity,
        }
    }

    /// Moves the internal buffer to the given device.
    pub fn to(&mut self, device: &Device) -> Result<()> {
        if let Some(buf) = &self.buf {
            self.buf = Some(buf.to_device(device)?);
        }
        Ok(())
    }
}

impl BatchBase for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: None,
            capacity,
        }
    }

    /// Pushes given data.
    ///
    /// If the internal buffer is empty, it is initialized with the shape
    /// `[capacity, data.buf.dims()[1..]]`.
    fn push(&mut self, index: usize, data: Self) {
        if data.buf.is_none() {
            return;
        }

        let batch_size = data.buf.as_ref().unwrap().dims()[0];
        if batch_size == 0 {
            return;
        }

        if self.buf.is_none() {
            let mut shape = data.buf.as_ref().unwrap().dims().to_vec();
            shape[0] = self.capacity;
            let dtype = data.buf.as_ref().unwrap().dtype();
            self.buf = Some(Tensor::zeros(shape, dtype, &Device::Cpu).unwrap());
        }

        if index + batch_size > self.capacity {
            // Wraps around the end of the ring buffer.
            let batch_size = self.capacity - index;
            let data = &data.buf.unwrap();
            let data1 = data.i((..batch_size,)).unwrap();
            let data2 = data.i((batch_size..,)).unwrap();
            self.buf
                .as_mut()
                .unwrap()
                .slice_set(&data1, 0, index)
                .unwrap();
            self.buf.as_mut().unwrap().slice_set(&data2, 0, 0).unwrap();
        } else {
            self.buf
                .as_mut()
                .unwrap()
                .slice_set(&data.buf.unwrap(), 0, index)
                .unwrap();
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let capacity = ixs.len();
        let ixs = {
            let device = self.buf.as_ref().unwrap().device();
            let ixs = ixs.iter().map(|x| *x as u32).collect();
            Tensor::from_vec(ixs, &[capacity], device).unwrap()
        };
        let buf = Some(self.buf.as_ref().unwrap().index_select(&ixs, 0).unwrap());
        Self { buf, capacity }
    }
}

impl From<TensorBatch> for Tensor {
    fn from(b: TensorBatch) -> Self {
        b.buf.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vals: &[f32]) -> TensorBatch {
        let t = Tensor::from_slice(vals, (1, vals.len()), &Device::Cpu).unwrap();
        TensorBatch::from_tensor(t)
    }

    #[test]
    fn test_push_and_sample() {
        let mut batch = TensorBatch::new(3);
        batch.push(0, row(&[0.0, 0.0]));
        batch.push(1, row(&[1.0, 1.0]));
        batch.push(2, row(&[2.0, 2.0]));

        let sampled: Tensor = batch.sample(&vec![2, 0]).into();
        assert_eq!(
            sampled.to_vec2::<f32>().unwrap(),
            vec![vec![2.0, 2.0], vec![0.0, 0.0]]
        );
    }

    #[test]
    fn test_push_wraps_around() {
        let mut batch = TensorBatch::new(2);
        batch.push(0, row(&[0.0]));
        batch.push(1, row(&[1.0]));
        let t = Tensor::from_slice(&[2.0f32, 3.0], (2, 1), &Device::Cpu).unwrap();
        batch.push(1, TensorBatch::from_tensor(t));

        let all: Tensor = batch.sample(&vec![0, 1]).into();
        assert_eq!(all.to_vec2::<f32>().unwrap(), vec![vec![3.0], vec![2.0]]);
    }
}
