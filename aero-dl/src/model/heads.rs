use crate::common::*;

/// The classification head: shared features to class logits.
#[derive(Debug, Clone)]
pub struct ClassificationHeadInit {
    pub in_dim: i64,
    pub hidden_dim: i64,
    pub num_classes: i64,
    pub dropout: f64,
}

impl ClassificationHeadInit {
    pub fn new(in_dim: i64, num_classes: i64) -> Self {
        Self {
            in_dim,
            hidden_dim: 512,
            num_classes,
            dropout: 0.5,
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<ClassificationHead>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_dim,
            hidden_dim,
            num_classes,
            dropout,
        } = self;
        ensure!(
            in_dim > 0 && hidden_dim > 0 && num_classes > 1,
            "bad classification head dimensions"
        );
        ensure!((0.0..1.0).contains(&dropout), "dropout must lie in [0, 1)");

        let seq = nn::seq_t()
            .add(nn::linear(
                path / "fc1",
                in_dim,
                hidden_dim,
                Default::default(),
            ))
            .add_fn(|xs| xs.relu())
            .add_fn_t(move |xs, train| xs.dropout(dropout, train))
            .add(nn::linear(
                path / "fc2",
                hidden_dim,
                num_classes,
                Default::default(),
            ));

        Ok(ClassificationHead { seq })
    }
}

#[derive(Debug)]
pub struct ClassificationHead {
    seq: nn::SequentialT,
}

impl nn::ModuleT for ClassificationHead {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        self.seq.forward_t(xs, train)
    }
}

/// The box regression head: shared features to four sigmoid-bounded
/// ratio coordinates.
#[derive(Debug, Clone)]
pub struct BoxRegressionHeadInit {
    pub in_dim: i64,
    pub hidden_dim: i64,
    pub dropout: f64,
}

impl BoxRegressionHeadInit {
    pub fn new(in_dim: i64) -> Self {
        Self {
            in_dim,
            hidden_dim: 256,
            dropout: 0.5,
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<BoxRegressionHead>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_dim,
            hidden_dim,
            dropout,
        } = self;
        ensure!(in_dim > 0 && hidden_dim > 0, "bad regression head dimensions");
        ensure!((0.0..1.0).contains(&dropout), "dropout must lie in [0, 1)");

        let seq = nn::seq_t()
            .add(nn::linear(
                path / "fc1",
                in_dim,
                hidden_dim,
                Default::default(),
            ))
            .add_fn(|xs| xs.relu())
            .add_fn_t(move |xs, train| xs.dropout(dropout, train))
            .add(nn::linear(path / "fc2", hidden_dim, 4, Default::default()))
            .add_fn(|xs| xs.sigmoid());

        Ok(BoxRegressionHead { seq })
    }
}

#[derive(Debug)]
pub struct BoxRegressionHead {
    seq: nn::SequentialT,
}

impl nn::ModuleT for BoxRegressionHead {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        self.seq.forward_t(xs, train)
    }
}
