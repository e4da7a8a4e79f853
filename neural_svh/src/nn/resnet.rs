//! Fully connected residual block.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Configuration for a [`ResnetBlock`].
#[derive(Config, Debug)]
pub struct ResnetBlockConfig {
    /// Input width.
    pub size_in: usize,
    /// Output width. Defaults to `size_in`.
    pub size_out: Option<usize>,
    /// Hidden width. Defaults to `min(size_in, size_out)`.
    pub size_h: Option<usize>,
}

impl ResnetBlockConfig {
    /// Initialize the block.
    ///
    /// The output layer starts at zero (weight and bias), so a fresh block returns
    /// exactly its shortcut.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResnetBlock<B> {
        let size_in = self.size_in;
        let size_out = self.size_out.unwrap_or(size_in);
        let size_h = self.size_h.unwrap_or(size_in.min(size_out));

        let fc_0 = LinearConfig::new(size_in, size_h).init(device);
        let fc_1 = LinearConfig::new(size_h, size_out)
            .with_initializer(Initializer::Zeros)
            .init(device);

        let shortcut = if size_in == size_out {
            None
        } else {
            Some(
                LinearConfig::new(size_in, size_out)
                    .with_bias(false)
                    .init(device),
            )
        };

        ResnetBlock {
            fc_0,
            fc_1,
            shortcut,
            activation: Relu::new(),
            size_in,
            size_h,
            size_out,
        }
    }
}

/// Two-layer residual block: `shortcut(x) + fc_1(relu(fc_0(relu(x))))`.
///
/// The shortcut is the identity when input and output widths match, and a
/// bias-free linear projection otherwise.
#[derive(Module, Debug)]
pub struct ResnetBlock<B: Backend> {
    fc_0: Linear<B>,
    fc_1: Linear<B>,
    shortcut: Option<Linear<B>>,
    activation: Relu,
    #[module(skip)]
    size_in: usize,
    #[module(skip)]
    size_h: usize,
    #[module(skip)]
    size_out: usize,
}

impl<B: Backend> ResnetBlock<B> {
    /// Forward pass.
    ///
    /// Input shape: [batch, size_in]
    /// Output shape: [batch, size_out]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let net = self.fc_0.forward(self.activation.forward(x.clone()));
        let dx = self.fc_1.forward(self.activation.forward(net));

        let x_s = match &self.shortcut {
            Some(shortcut) => shortcut.forward(x),
            None => x,
        };

        x_s + dx
    }

    /// The learned shortcut projection, if the block changes width.
    pub fn shortcut(&self) -> Option<&Linear<B>> {
        self.shortcut.as_ref()
    }

    /// Input width.
    pub fn size_in(&self) -> usize {
        self.size_in
    }

    /// Hidden width.
    pub fn size_h(&self) -> usize {
        self.size_h
    }

    /// Output width.
    pub fn size_out(&self) -> usize {
        self.size_out
    }
}
